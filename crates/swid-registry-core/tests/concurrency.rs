//! Concurrent registrations against one store and broker.

mod common;

use common::*;
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_agents_get_distinct_channels() {
    const AGENTS: usize = 24;

    let harness = Harness::new();
    let (ada, caller) = harness.bootstrap_person("Ada").await;

    let mut handles = Vec::new();
    for i in 0..AGENTS {
        let service = harness.service.clone();
        let caller = caller.clone();
        // Separate directories so artifact files do not collide
        let request = swid_registry_core::RegistrationRequest::from_value(
            &agent("Scout One"),
            harness.output.path().join(format!("run-{}", i)),
        );
        handles.push(tokio::spawn(async move {
            use swid_registry_core::Registration;
            service.register(&caller, request).await
        }));
    }

    let mut channels = HashSet::new();
    let mut identifiers = HashSet::new();
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert!(identifiers.insert(receipt.identifier.clone()));
        assert!(channels.insert(receipt.record.channel_name.unwrap()));
    }

    assert_eq!(channels.len(), AGENTS);
    assert_eq!(harness.broker.channels().await.len(), AGENTS);
    for channel in &channels {
        assert!(channel.starts_with("scout_one_"));
        assert_eq!(harness.broker.messages(channel).await.len(), 1);
    }

    let listed = harness
        .service
        .store()
        .records_registered_by(&ada.identifier)
        .await
        .unwrap();
    assert_eq!(listed.len(), AGENTS + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overwrites_leave_one_binding() {
    let harness = Harness::new();
    let (_, caller) = harness.bootstrap_person("Ada").await;
    let scout = harness.register(&caller, &agent("Scout One")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = harness.service.clone();
        let caller = caller.clone();
        let mut document = agent("Scout One");
        document["swid"] = serde_json::Value::String(scout.identifier.clone());
        let request = swid_registry_core::RegistrationRequest::from_value(
            &document,
            harness.output.path().join(format!("rerun-{}", i)),
        );
        handles.push(tokio::spawn(async move {
            use swid_registry_core::Registration;
            service.register(&caller, request).await
        }));
    }

    let mut bound = HashSet::new();
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert!(receipt.overwrote());
        bound.insert(receipt.record.channel_name.unwrap());
    }

    // Every overwrite claimed its own name; the record keeps exactly one
    assert_eq!(bound.len(), 8);
    let stored = harness
        .service
        .store()
        .get(&scout.identifier)
        .await
        .unwrap()
        .unwrap();
    assert!(bound.contains(stored.channel_name.as_ref().unwrap()));
}
