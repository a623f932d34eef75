//! Friend requests and friend lists.
//!
//! A friendship is a pair of directed edges. A request creates one
//! `PENDING` edge from requester to addressee. Accepting flips it to
//! `ACCEPTED` and adds the mirrored `ACCEPTED` edge in the same unit of
//! work, so social actions can check either direction. Blocking leaves a
//! single `BLOCKED` edge that stops further requests between the pair.

use std::sync::Arc;

use homestead_core::{Clock, leveling};
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{Friendship, FriendView, FriendshipStatus, PendingRequestView, User, UserId};

use crate::error::GameError;
use crate::lookup;

/// Friend requests, responses, and lists.
#[derive(Debug)]
pub struct FriendsService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for FriendsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: FarmStore> FriendsService<S> {
    /// Create a service over `store`, reading time from `clock`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Send a friend request from `requester_id` to `addressee_id`.
    pub async fn send_request(
        &self,
        requester_id: UserId,
        addressee_id: UserId,
    ) -> Result<Friendship, GameError> {
        if requester_id == addressee_id {
            return Err(GameError::SelfInteraction);
        }
        let mut tx = self.store.begin().await?;
        lookup::require_user(&mut tx, requester_id).await?;
        if tx.user(addressee_id).await?.is_none() {
            return Err(GameError::FriendNotFound {
                friend_id: addressee_id,
            });
        }

        let outgoing = tx.friendship(requester_id, addressee_id).await?;
        let incoming = tx.friendship(addressee_id, requester_id).await?;
        if let Some(edge) = outgoing.iter().chain(&incoming).next() {
            return Err(match edge.status {
                FriendshipStatus::Accepted => GameError::AlreadyFriends,
                FriendshipStatus::Pending => GameError::FriendRequestPending,
                FriendshipStatus::Blocked => GameError::FriendRequestBlocked,
            });
        }

        let edge = Friendship {
            requester_id,
            addressee_id,
            status: FriendshipStatus::Pending,
            created_at: self.clock.now(),
        };
        tx.upsert_friendship(&edge).await?;
        tx.commit().await?;
        tracing::info!(%requester_id, %addressee_id, "Friend request sent");
        Ok(edge)
    }

    /// Answer a pending request from `requester_id`. Only `Accepted` and
    /// `Blocked` are valid answers.
    pub async fn respond(
        &self,
        addressee_id: UserId,
        requester_id: UserId,
        answer: FriendshipStatus,
    ) -> Result<Friendship, GameError> {
        if answer == FriendshipStatus::Pending {
            return Err(GameError::InvalidFriendResponse);
        }
        let mut tx = self.store.begin().await?;
        let pending = tx
            .friendship(requester_id, addressee_id)
            .await?
            .filter(|edge| edge.status == FriendshipStatus::Pending)
            .ok_or(GameError::FriendRequestNotFound { requester_id })?;

        let answered = Friendship {
            status: answer,
            ..pending
        };
        tx.upsert_friendship(&answered).await?;
        if answer == FriendshipStatus::Accepted {
            tx.upsert_friendship(&Friendship {
                requester_id: addressee_id,
                addressee_id: requester_id,
                status: FriendshipStatus::Accepted,
                created_at: self.clock.now(),
            })
            .await?;
        }
        tx.commit().await?;
        tracing::info!(%addressee_id, %requester_id, ?answer, "Friend request answered");
        Ok(answered)
    }

    /// Accepted friends of `user_id`, ordered by id.
    pub async fn list_friends(&self, user_id: UserId) -> Result<Vec<FriendView>, GameError> {
        let mut tx = self.store.begin().await?;
        let ids: Vec<UserId> = tx
            .friendships_from(user_id, FriendshipStatus::Accepted)
            .await?
            .into_iter()
            .map(|edge| edge.addressee_id)
            .collect();
        let mut friends: Vec<FriendView> = tx.users(&ids).await?.iter().map(friend_view).collect();
        friends.sort_by_key(|f| f.id);
        Ok(friends)
    }

    /// Requests waiting for `user_id` to answer, oldest first.
    pub async fn list_pending(&self, user_id: UserId) -> Result<Vec<PendingRequestView>, GameError> {
        let mut tx = self.store.begin().await?;
        let mut edges = tx.friendships_to(user_id, FriendshipStatus::Pending).await?;
        edges.sort_by_key(|edge| (edge.created_at, edge.requester_id));
        let ids: Vec<UserId> = edges.iter().map(|edge| edge.requester_id).collect();
        let users = tx.users(&ids).await?;
        Ok(edges
            .iter()
            .filter_map(|edge| {
                let requester = users.iter().find(|u| u.id == edge.requester_id)?;
                Some(PendingRequestView {
                    requester: friend_view(requester),
                    created_at: edge.created_at,
                })
            })
            .collect())
    }

    /// End a friendship, removing both edges.
    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(), GameError> {
        let mut tx = self.store.begin().await?;
        let accepted = |edge: Option<Friendship>| {
            edge.is_some_and(|e| e.status == FriendshipStatus::Accepted)
        };
        let outgoing = accepted(tx.friendship(user_id, friend_id).await?);
        let incoming = accepted(tx.friendship(friend_id, user_id).await?);
        if !outgoing && !incoming {
            return Err(GameError::NotFriends { friend_id });
        }
        if outgoing {
            tx.delete_friendship(user_id, friend_id).await?;
        }
        if incoming {
            tx.delete_friendship(friend_id, user_id).await?;
        }
        tx.commit().await?;
        tracing::info!(%user_id, %friend_id, "Friendship removed");
        Ok(())
    }
}

fn friend_view(user: &User) -> FriendView {
    FriendView {
        id: user.id,
        nick_name: user.nick_name.clone(),
        level: leveling::level_for_exp(user.exp),
    }
}
