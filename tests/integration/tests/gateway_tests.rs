//! Gateway Integration Tests
//!
//! Exercise the Satori HTTP client, the dispatcher, and the event stream
//! against fake hosts bound to localhost.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{
    eventually, fid, guild, member, satori_config, test_context, FakeEventHost, FakeHttpHost,
    RecordedRequest,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use waifu_common::WaifuConfig;
use waifu_gateway::{CommandParser, Dispatcher, Event, EventStream, EventType, SatoriClient};
use waifu_service::{RosterResolver, RosterSource};

/// Member list of `ids`, two per page, plus an empty answer for sends
fn answer_paged(
    ids: &'static [&'static str],
) -> impl Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static {
    move |req: &RecordedRequest| match req.path.as_str() {
        "/v1/guild.member.list" => {
            let index: usize = req.body["next"]
                .as_str()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            let start = (index * 2).min(ids.len());
            let end = (start + 2).min(ids.len());
            let data: Vec<_> = ids[start..end].iter().map(|id| member(id)).collect();
            let mut page = json!({ "data": data });
            if end < ids.len() {
                page["next"] = json!((index + 1).to_string());
            }
            (200, page)
        }
        "/v1/message.create" => (200, json!([])),
        _ => (404, json!({ "error": "unknown method" })),
    }
}

fn message_event(sn: u64, user_id: &str, content: &str) -> Value {
    json!({
        "sn": sn,
        "type": "message-created",
        "platform": "qq",
        "self_id": "bot",
        "channel": { "id": "c1" },
        "guild": { "id": "g1" },
        "user": { "id": user_id, "name": format!("name-{user_id}") },
        "message": { "id": format!("m{sn}"), "content": content },
    })
}

// ============================================================================
// HTTP client
// ============================================================================

#[tokio::test]
async fn test_member_list_pages_over_http() {
    let host = FakeHttpHost::start(answer_paged(&["a", "b", "c", "d", "e"]))
        .await
        .unwrap();
    let client = SatoriClient::new(&satori_config(&host.endpoint())).unwrap();
    let bot = client.bot("qq", "bot");
    let ctx = test_context(WaifuConfig::default(), 1);

    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &bot)
        .await
        .unwrap();
    assert_eq!(source, RosterSource::Live);
    assert_eq!(roster.len(), 5);

    let requests = host.requests();
    assert_eq!(requests.len(), 3);
    let first = &requests[0];
    assert_eq!(first.path, "/v1/guild.member.list");
    assert_eq!(first.body, json!({ "guild_id": "g1" }));
    assert_eq!(first.header("authorization"), Some("Bearer secret"));
    assert_eq!(first.header("satori-platform"), Some("qq"));
    assert_eq!(first.header("satori-user-id"), Some("bot"));
    assert_eq!(first.header("x-platform"), Some("qq"));
    assert_eq!(first.header("x-self-id"), Some("bot"));
    assert_eq!(requests[2].body["next"], json!("2"));
}

#[tokio::test]
async fn test_host_error_status_falls_back() {
    let host = FakeHttpHost::start(|_| (500, json!({ "error": "boom" })))
        .await
        .unwrap();
    let client = SatoriClient::new(&satori_config(&host.endpoint())).unwrap();
    let ctx = test_context(WaifuConfig::default(), 1);
    ctx.directory().remember(&guild(), &member("a")).await.unwrap();

    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &client.bot("qq", "bot"))
        .await
        .unwrap();
    assert_eq!(source, RosterSource::Directory);
    assert!(roster.contains_key("a"));
}

// ============================================================================
// Dispatcher
// ============================================================================

#[tokio::test]
async fn test_message_event_sends_reply() {
    let host = FakeHttpHost::start(answer_paged(&["a", "b"])).await.unwrap();
    let client = SatoriClient::new(&satori_config(&host.endpoint())).unwrap();
    let dispatcher = Dispatcher::new(
        test_context(WaifuConfig::default(), 1),
        client,
        CommandParser::default(),
    );

    let event: Event = serde_json::from_value(message_event(7, "a", "waifu")).unwrap();
    dispatcher.handle(event).await;

    let sends: Vec<_> = host
        .requests()
        .into_iter()
        .filter(|r| r.path == "/v1/message.create")
        .collect();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].body["channel_id"], json!("c1"));
    assert_eq!(
        sends[0].body["content"],
        json!("<quote id=\"m7\"/>Your waifu today is name-b!<img src=\"https://cdn.example/b.png\"/>")
    );

    let ctx = dispatcher.context();
    assert_eq!(ctx.relationships().partner_of(&fid("b")).unwrap().user_id(), Some("a"));
    // The sender was recorded in the directory on the way in
    assert!(ctx.directory().member(&guild(), "a").await.unwrap().is_some());
}

#[tokio::test]
async fn test_plain_chatter_sends_nothing() {
    let host = FakeHttpHost::start(answer_paged(&["a", "b"])).await.unwrap();
    let client = SatoriClient::new(&satori_config(&host.endpoint())).unwrap();
    let dispatcher = Dispatcher::new(
        test_context(WaifuConfig::default(), 1),
        client,
        CommandParser::default(),
    );

    let event: Event = serde_json::from_value(message_event(1, "a", "good morning")).unwrap();
    dispatcher.handle(event).await;

    let mut own = Event::new(EventType::MessageCreated, "qq", "bot");
    own.user = serde_json::from_value(json!({ "id": "bot" })).unwrap();
    dispatcher.handle(own).await;

    assert!(host.requests().is_empty());
}

// ============================================================================
// Event stream
// ============================================================================

#[tokio::test]
async fn test_event_stream_forwards_and_resumes() {
    let events = vec![
        message_event(1, "a", "hello"),
        json!({ "sn": 2, "type": "guild-member-removed", "platform": "qq",
                "guild": { "id": "g1" }, "user": { "id": "b" } }),
    ];
    let host = FakeEventHost::start(events).await.unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let stream = EventStream::new(satori_config(&host.endpoint())).spawn(tx);

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.kind, EventType::MessageCreated);
    assert_eq!(first.content(), "hello");

    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.kind, EventType::GuildMemberRemoved);
    assert_eq!(second.sn, Some(2));

    // The host closes after each session; the stream reconnects and
    // resumes from the last sequence number
    assert!(eventually(|| host.identifies().len() >= 2, Duration::from_secs(5)).await);
    let identifies = host.identifies();
    assert_eq!(identifies[0]["token"], json!("secret"));
    assert_eq!(identifies[0]["sn"], Value::Null);
    assert_eq!(identifies[1]["sn"], json!(2));

    stream.abort();
}

#[tokio::test]
async fn test_event_stream_stops_when_receiver_dropped() {
    let host = FakeEventHost::start(vec![message_event(1, "a", "hello")])
        .await
        .unwrap();

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let stream = EventStream::new(satori_config(&host.endpoint())).spawn(tx);

    tokio::time::timeout(Duration::from_secs(5), stream)
        .await
        .expect("stream did not stop")
        .unwrap();
}
