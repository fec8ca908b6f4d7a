//! Snapshot cache integration tests.

use std::sync::Arc;
use std::time::Duration;

use gateway_control_plane::envoy::{Address, Cluster, DiscoveryType, Listener, RouteConfiguration};
use gateway_control_plane::prelude::*;

fn cluster(name: &str) -> BoxResource {
    Arc::new(Cluster {
        name: name.to_string(),
        discovery_type: DiscoveryType::StrictDns,
        connect_timeout: Duration::from_secs(20),
        hosts: vec![Address::new("127.0.0.1", 8082)],
        http2_protocol_options: None,
    })
}

fn listener() -> BoxResource {
    Arc::new(Listener::ingress(
        Address::new("0.0.0.0", 8080),
        vec![],
        RouteConfiguration::for_backend("backend", None),
    ))
}

#[test]
fn cache_basic_operations() {
    let cache = SnapshotCache::new();
    let node = NodeHash::from_id("api_proxy");

    let snapshot = Snapshot::builder()
        .version("2019-03-02r0")
        .resources(TypeUrl::Cluster, vec![cluster("backend")])
        .build();
    cache.set_snapshot(node, snapshot);

    let retrieved = cache.get_snapshot(node).expect("snapshot exists");
    assert_eq!(retrieved.version(), "2019-03-02r0");
    assert!(retrieved.contains_type(TypeUrl::Cluster));

    cache.clear_snapshot(node);
    assert!(cache.get_snapshot(node).is_none());
}

#[test]
fn cache_keys_nodes_independently() {
    let cache = SnapshotCache::new();

    for (i, node_id) in ["proxy-1", "proxy-2", "proxy-3"].iter().enumerate() {
        let snapshot = Snapshot::builder()
            .version(format!("v{}", i + 1))
            .resources(TypeUrl::Cluster, vec![cluster("backend")])
            .build();
        cache.set_snapshot(NodeHash::from_id(node_id), snapshot);
    }

    assert_eq!(cache.snapshot_count(), 3);
    for (i, node_id) in ["proxy-1", "proxy-2", "proxy-3"].iter().enumerate() {
        let snapshot = cache
            .get_snapshot(NodeHash::from_id(node_id))
            .expect("snapshot exists");
        assert_eq!(snapshot.version(), format!("v{}", i + 1));
    }
}

#[test]
fn fetch_is_coherent_across_type_urls() {
    let cache = SnapshotCache::new();
    let node = NodeHash::from_id("api_proxy");

    cache.set_snapshot(
        node,
        Snapshot::from_resources(
            "2019-03-02r0",
            vec![listener()],
            vec![cluster("backend")],
            vec![],
            vec![],
        ),
    );

    // Both type URLs report the same version: the resources were
    // generated from the same config document.
    let listeners = cache
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Listener))
        .expect("listeners");
    let clusters = cache
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Cluster))
        .expect("clusters");
    assert_eq!(listeners.version, clusters.version);
}

#[test]
fn fetch_after_replacement_sees_only_the_new_set() {
    let cache = SnapshotCache::new();
    let node = NodeHash::from_id("api_proxy");

    cache.set_snapshot(
        node,
        Snapshot::builder()
            .version("2018-12-05r0")
            .resources(TypeUrl::Cluster, vec![cluster("old-backend")])
            .build(),
    );
    cache.set_snapshot(
        node,
        Snapshot::builder()
            .version("2018-12-05r1")
            .resources(TypeUrl::Cluster, vec![cluster("new-backend")])
            .build(),
    );

    let response = cache
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Cluster))
        .expect("clusters");
    assert_eq!(response.version, "2018-12-05r1");
    assert_eq!(response.resources.len(), 1);

    let decoded: serde_json::Value =
        serde_json::from_slice(&response.resources[0].value).expect("cluster JSON");
    assert_eq!(decoded["name"], "new-backend");
}

#[test]
fn concurrent_readers_see_whole_snapshots() {
    let cache = Arc::new(SnapshotCache::new());
    let node = NodeHash::from_id("api_proxy");

    cache.set_snapshot(
        node,
        Snapshot::builder()
            .version("v0")
            .resources(TypeUrl::Cluster, vec![cluster("backend-v0")])
            .build(),
    );

    let writer = {
        let cache = Arc::clone(&cache);
        std::thread::spawn(move || {
            for i in 1..=50 {
                let version = format!("v{i}");
                let name = format!("backend-v{i}");
                cache.set_snapshot(
                    node,
                    Snapshot::builder()
                        .version(version)
                        .resources(TypeUrl::Cluster, vec![cluster(&name)])
                        .build(),
                );
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let response = cache
                        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Cluster))
                        .expect("snapshot always present");
                    // The cluster name always matches the version it was
                    // published with; a torn read would break this.
                    let decoded: serde_json::Value =
                        serde_json::from_slice(&response.resources[0].value)
                            .expect("cluster JSON");
                    let name = decoded["name"].as_str().expect("name");
                    assert_eq!(name, format!("backend-{}", response.version));
                }
            })
        })
        .collect();

    writer.join().expect("writer finishes");
    for reader in readers {
        reader.join().expect("reader finishes");
    }
}

#[tokio::test]
async fn watches_observe_every_published_version() {
    let cache = SnapshotCache::new();
    let node = NodeHash::from_id("api_proxy");

    let mut watch = cache.create_watch(node);

    cache.set_snapshot(node, Snapshot::builder().version("v1").build());
    let snapshot = tokio::time::timeout(Duration::from_secs(1), watch.recv())
        .await
        .expect("notified in time")
        .expect("watch open");
    assert_eq!(snapshot.version(), "v1");

    cache.set_snapshot(node, Snapshot::builder().version("v2").build());
    let snapshot = tokio::time::timeout(Duration::from_secs(1), watch.recv())
        .await
        .expect("notified in time")
        .expect("watch open");
    assert_eq!(snapshot.version(), "v2");
}
