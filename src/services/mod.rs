// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - authorization, fetching and normalization.

pub mod auth;
pub mod credentials;
pub mod fitbit;
pub mod normalize;

pub use auth::TokenManager;
pub use credentials::CredentialStore;
pub use fitbit::{DailyResource, FitbitClient};
pub use normalize::{Normalizer, TimestampKind};
