//! Concurrency tests: one shared, immutable assistant serving many requests.

use std::sync::Arc;

use faqroute::{
    Answer, Assistant, AssistantConfig, Embedder, HashedEmbedder, KnowledgeBase, KnowledgeIndex,
    ScriptedBackend, StreamEvent,
};
use futures::StreamExt;

async fn shared_assistant() -> Arc<Assistant> {
    let embedder: Arc<dyn Embedder> = Arc::new(HashedEmbedder::new("hashed-bow-v1", 384).unwrap());
    let kb = KnowledgeBase::load(concat!(env!("CARGO_MANIFEST_DIR"), "/knowledge_base.json"))
        .unwrap();
    let index = KnowledgeIndex::build(kb, embedder.as_ref()).await.unwrap();
    let mut config = AssistantConfig::default();
    config.generation.pacing_ms = 1;
    let backend = Arc::new(ScriptedBackend::new(
        "scripted",
        ["I'm not sure about this.", " Please contact the relevant department."],
    ));
    Arc::new(Assistant::from_parts(Arc::new(index), embedder, backend, &config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_routing_is_consistent() {
    let assistant = shared_assistant().await;
    let expected = assistant.route("How do I reset my password?").await.unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.route("How do I reset my password?").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_streams_do_not_interleave() {
    let assistant = shared_assistant().await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move {
                let question = format!("unrelated question number {i} about quarterly budgets");
                match assistant.answer(&question, &[]).await.unwrap() {
                    Answer::Stream { events, .. } => events.collect::<Vec<_>>().await,
                    Answer::Direct { response, .. } => panic!("unexpected match: {response}"),
                }
            })
        })
        .collect();

    let mut transcripts = Vec::new();
    for handle in handles {
        transcripts.push(handle.await.unwrap());
    }

    for events in &transcripts {
        assert_eq!(events.first(), Some(&StreamEvent::start("scripted")));
        assert_eq!(events.last(), Some(&StreamEvent::End));
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Chunk { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            text,
            "I'm not sure about this. Please contact the relevant department."
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abandoned_stream_does_not_affect_others() {
    let assistant = shared_assistant().await;

    let Answer::Stream { events, .. } = assistant.answer("weather forecast", &[]).await.unwrap()
    else {
        panic!("expected a stream");
    };
    let mut abandoned = events;
    assert_eq!(abandoned.next().await, Some(StreamEvent::start("scripted")));
    drop(abandoned);

    let Answer::Stream { events, .. } = assistant.answer("weather forecast", &[]).await.unwrap()
    else {
        panic!("expected a stream");
    };
    let events: Vec<_> = events.collect().await;
    assert_eq!(events.last(), Some(&StreamEvent::End));
}
