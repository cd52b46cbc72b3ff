//! Roster Resolution Integration Tests
//!
//! The Redis-backed test requires:
//! - Running Redis instance
//! - Environment variable: REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test roster_tests

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    guild, member, members, redis_config, requester, test_context, test_context_with_cache,
    unique_guild, FakeHost,
};
use waifu_cache::RedisPool;
use waifu_common::WaifuConfig;
use waifu_core::MemberSnapshot;
use waifu_service::{MembershipListener, RosterResolver, RosterSource, WaifuService};

fn ids(members: impl IntoIterator<Item = MemberSnapshot>) -> HashSet<String> {
    members
        .into_iter()
        .filter_map(|m| m.user_id().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_failing_host_falls_back_to_directory_exactly() {
    let ctx = test_context(WaifuConfig::default(), 1);
    let listener = MembershipListener::new(&ctx);
    for id in ["a", "b", "c"] {
        listener.on_message(&guild(), &member(id)).await;
    }

    let host = FakeHost::new(members(&["a", "b", "c", "d", "e"]))
        .paged(2)
        .failing_at(1);
    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &host)
        .await
        .unwrap();

    assert_eq!(source, RosterSource::Directory);
    assert_eq!(ids(roster.into_values()), ids(members(&["a", "b", "c"])));
}

#[tokio::test]
async fn test_partial_live_pages_used_when_directory_is_empty() {
    let ctx = test_context(WaifuConfig::default(), 1);
    let host = FakeHost::new(members(&["a", "b", "c", "d", "e"]))
        .paged(2)
        .failing_at(1);

    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &host)
        .await
        .unwrap();

    assert_eq!(source, RosterSource::PartialLive);
    assert_eq!(ids(roster.into_values()), ids(members(&["a", "b"])));
}

#[tokio::test]
async fn test_paginated_listing_is_followed_and_cached() {
    let ctx = test_context(WaifuConfig::default(), 1);
    let all = ["a", "b", "c", "d", "e", "f", "g"];
    let host = FakeHost::new(members(&all)).paged(3);

    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &host)
        .await
        .unwrap();
    assert_eq!(source, RosterSource::Live);
    assert_eq!(roster.len(), all.len());
    assert_eq!(host.calls(), 3);

    // Second resolution is served in-process
    let (_, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &host)
        .await
        .unwrap();
    assert_eq!(source, RosterSource::InProcess);
    assert_eq!(host.calls(), 3);
}

#[tokio::test]
async fn test_nothing_anywhere_is_not_cached() {
    let ctx = test_context(WaifuConfig::default(), 1);

    assert!(RosterResolver::new(&ctx)
        .resolve_with_source(&guild(), &FakeHost::down())
        .await
        .is_none());
    assert!(ctx.rosters().get(&guild()).is_none());

    // The next request tries the host again
    let host = FakeHost::new(members(&["a", "b"]));
    let marriage = WaifuService::new(&ctx)
        .marry(&requester("a"), &host)
        .await
        .unwrap();
    assert_eq!(marriage.partner, member("b"));
    assert_eq!(host.calls(), 1);
}

#[tokio::test]
async fn test_departed_member_leaves_roster_and_directory() {
    let ctx = test_context(WaifuConfig::default(), 1);
    let listener = MembershipListener::new(&ctx);
    listener.on_message(&guild(), &member("b")).await;

    let host = FakeHost::new(members(&["a", "b", "c"]));
    RosterResolver::new(&ctx).resolve(&guild(), &host).await;
    assert!(listener.on_member_added(&guild(), member("d")));

    listener.on_member_removed(&guild(), "b").await;

    let roster = ctx.rosters().get(&guild()).unwrap();
    assert_eq!(ids(roster.into_values()), ids(members(&["a", "c", "d"])));
    assert!(ctx.directory().member(&guild(), "b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_active_only_pool_from_directory() {
    let config = WaifuConfig {
        only_active_user: true,
        ..WaifuConfig::default()
    };
    let ctx = test_context(config, 1);
    MembershipListener::new(&ctx)
        .on_message(&guild(), &member("c"))
        .await;

    let marriage = WaifuService::new(&ctx)
        .marry(&requester("a"), &FakeHost::new(members(&["a", "b", "c", "d"])))
        .await
        .unwrap();
    assert_eq!(marriage.partner, member("c"));
}

#[tokio::test]
async fn test_active_only_pool_with_zero_day_window() {
    let config = WaifuConfig {
        only_active_user: true,
        active_days: 0,
        ..WaifuConfig::default()
    };
    let ctx = test_context(config, 1);
    let listener = MembershipListener::new(&ctx);
    listener.on_message(&guild(), &member("b")).await;
    listener.on_message(&guild(), &member("c")).await;

    let marriage = WaifuService::new(&ctx)
        .marry(&requester("a"), &FakeHost::new(members(&["a", "b", "c"])))
        .await
        .unwrap();
    assert!(marriage.partner == member("b") || marriage.partner == member("c"));
}

#[tokio::test]
async fn test_redis_directory_fallback() {
    let Some(config) = redis_config() else {
        return;
    };

    let pool = RedisPool::from_config(&config).expect("Failed to create Redis pool");
    pool.health_check().await.expect("Redis not reachable");
    let ctx = test_context_with_cache(Arc::new(pool), WaifuConfig::default(), 1);
    let gid = unique_guild();

    ctx.directory().remember(&gid, &member("a")).await.unwrap();
    ctx.directory().remember(&gid, &member("b")).await.unwrap();
    ctx.directory()
        .mark_active(&gid, "b", Duration::from_secs(60))
        .await
        .unwrap();

    let (roster, source) = RosterResolver::new(&ctx)
        .resolve_with_source(&gid, &FakeHost::down())
        .await
        .unwrap();
    assert_eq!(source, RosterSource::Directory);
    assert_eq!(ids(roster.into_values()), ids(members(&["a", "b"])));
    assert!(ctx.directory().active_user_ids(&gid).await.unwrap().contains("b"));

    ctx.directory().forget(&gid, "a").await.unwrap();
    ctx.directory().forget(&gid, "b").await.unwrap();
}
