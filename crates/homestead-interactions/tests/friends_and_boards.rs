//! Friend requests and leaderboards.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

mod common;

use common::{RADISH, World};
use homestead_interactions::GameError;
use homestead_types::{FriendshipStatus, ItemType, LeaderboardKind, UserId};

#[tokio::test]
async fn accepted_request_makes_a_mutual_friendship() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;

    let sent = world.game.friends.send_request(alice, bob).await.unwrap();
    assert_eq!(sent.status, FriendshipStatus::Pending);
    let pending = world.game.friends.list_pending(bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].requester.id, alice);
    assert!(world.game.friends.list_pending(alice).await.unwrap().is_empty());

    let accepted = world
        .game
        .friends
        .respond(bob, alice, FriendshipStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, FriendshipStatus::Accepted);

    let of_alice = world.game.friends.list_friends(alice).await.unwrap();
    let of_bob = world.game.friends.list_friends(bob).await.unwrap();
    assert_eq!(of_alice.len(), 1);
    assert_eq!(of_alice[0].id, bob);
    assert_eq!(of_bob[0].nick_name, "alice");
    assert!(world.game.friends.list_pending(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_and_invalid_requests_are_rejected() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;

    let own = world.game.friends.send_request(alice, alice).await.unwrap_err();
    assert!(matches!(own, GameError::SelfInteraction));
    let ghost = world
        .game
        .friends
        .send_request(alice, UserId::new(4_242))
        .await
        .unwrap_err();
    assert!(matches!(ghost, GameError::FriendNotFound { .. }));

    world.game.friends.send_request(alice, bob).await.unwrap();
    let twice = world.game.friends.send_request(alice, bob).await.unwrap_err();
    assert!(matches!(twice, GameError::FriendRequestPending));
    let crossed = world.game.friends.send_request(bob, alice).await.unwrap_err();
    assert!(matches!(crossed, GameError::FriendRequestPending));

    let undecided = world
        .game
        .friends
        .respond(bob, alice, FriendshipStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(undecided, GameError::InvalidFriendResponse));
    let wrong_way = world
        .game
        .friends
        .respond(alice, bob, FriendshipStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(wrong_way, GameError::FriendRequestNotFound { .. }));

    world
        .game
        .friends
        .respond(bob, alice, FriendshipStatus::Accepted)
        .await
        .unwrap();
    let already = world.game.friends.send_request(bob, alice).await.unwrap_err();
    assert!(matches!(already, GameError::AlreadyFriends));
    assert_eq!(already.code(), 4101);
}

#[tokio::test]
async fn blocked_requester_cannot_ask_again() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;
    world.game.friends.send_request(alice, bob).await.unwrap();
    world
        .game
        .friends
        .respond(bob, alice, FriendshipStatus::Blocked)
        .await
        .unwrap();

    let err = world.game.friends.send_request(alice, bob).await.unwrap_err();
    assert!(matches!(err, GameError::FriendRequestBlocked));
    assert!(world.game.friends.list_friends(bob).await.unwrap().is_empty());
    let visit = world
        .game
        .farms
        .friend_farm_overview(alice, bob)
        .await
        .unwrap_err();
    assert!(matches!(visit, GameError::NotFriends { .. }));
}

#[tokio::test]
async fn removing_a_friend_ends_farm_access() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;
    world.befriend(alice, bob).await;

    let farm = world.game.farms.friend_farm_overview(alice, bob).await.unwrap();
    assert_eq!(farm.owner_id, bob);
    assert_eq!(farm.plots.len(), 5);

    world.game.friends.remove_friend(bob, alice).await.unwrap();
    assert!(world.game.friends.list_friends(alice).await.unwrap().is_empty());
    let err = world.game.friends.remove_friend(alice, bob).await.unwrap_err();
    assert!(matches!(err, GameError::NotFriends { .. }));
    assert!(world.game.farms.friend_farm_overview(alice, bob).await.is_err());

    world.game.friends.send_request(bob, alice).await.unwrap();
}

#[tokio::test]
async fn harvest_board_counts_plots_not_batches() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;
    for index in [1, 2] {
        world.game.plots.plant(alice, index, RADISH).await.unwrap();
    }
    for index in [1, 2, 3] {
        world.game.plots.plant(bob, index, RADISH).await.unwrap();
    }
    world.advance(3600);
    world.game.batch.harvest_all(alice).await.unwrap();
    world.game.plots.harvest(bob, 1).await.unwrap();

    let board = world
        .game
        .leaderboards
        .get(LeaderboardKind::HarvestCount, None, 0)
        .await
        .unwrap();
    assert_eq!(board.kind, LeaderboardKind::HarvestCount);
    assert_eq!(board.entries.len(), 2);
    assert_eq!(board.entries[0].user_id, alice);
    assert_eq!(board.entries[0].value, "2");
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[1].user_id, bob);
    assert_eq!(board.entries[1].rank, 2);

    world.game.plots.harvest(bob, 2).await.unwrap();
    world.game.plots.harvest(bob, 3).await.unwrap();
    let cached = world
        .game
        .leaderboards
        .get(LeaderboardKind::HarvestCount, None, 0)
        .await
        .unwrap();
    assert_eq!(cached, board);

    world.advance(300);
    let fresh = world
        .game
        .leaderboards
        .get(LeaderboardKind::HarvestCount, None, 0)
        .await
        .unwrap();
    assert_eq!(fresh.entries[0].user_id, bob);
    assert_eq!(fresh.entries[0].value, "3");
}

#[tokio::test]
async fn wealth_board_shows_sales_once_the_page_expires() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;

    let before = world
        .game
        .leaderboards
        .get(LeaderboardKind::Wealth, Some(5), 0)
        .await
        .unwrap();
    assert_eq!(before.entries[0].user_id, alice);

    world
        .game
        .economy
        .sell(bob, ItemType::Seed, RADISH.into_inner(), 1)
        .await
        .unwrap();
    let cached = world
        .game
        .leaderboards
        .get(LeaderboardKind::Wealth, Some(5), 0)
        .await
        .unwrap();
    assert_eq!(cached, before);

    world.advance(300);
    let after = world
        .game
        .leaderboards
        .get(LeaderboardKind::Wealth, Some(5), 0)
        .await
        .unwrap();
    assert_eq!(after.entries[0].user_id, bob);
    assert_eq!(after.entries[0].value, "1005");
}

#[tokio::test]
async fn level_board_pages_with_offset() {
    let world = World::new();
    let alice = world.player("alice").await;
    let bob = world.player("bob").await;
    let carol = world.player("carol").await;
    world.set_exp(bob, 700).await;
    world.set_exp(carol, 200).await;

    let second_page = world
        .game
        .leaderboards
        .get(LeaderboardKind::Level, Some(2), 1)
        .await
        .unwrap();
    assert_eq!(second_page.entries.len(), 2);
    assert_eq!(second_page.entries[0].user_id, carol);
    assert_eq!(second_page.entries[0].rank, 2);
    assert_eq!(second_page.entries[0].level, 2);
    assert_eq!(second_page.entries[1].user_id, alice);
    assert_eq!(second_page.entries[1].rank, 3);
}

#[tokio::test]
async fn page_size_is_bounded() {
    let world = World::new();
    for limit in [0, 51] {
        let err = world
            .game
            .leaderboards
            .get(LeaderboardKind::StealCount, Some(limit), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput { .. }));
    }
    let empty = world
        .game
        .leaderboards
        .get(LeaderboardKind::StealCount, Some(50), 0)
        .await
        .unwrap();
    assert!(empty.entries.is_empty());
}
