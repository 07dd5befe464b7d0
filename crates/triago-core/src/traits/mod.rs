// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Triago's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod assistant;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use assistant::AssistantAdapter;
pub use channel::ChannelAdapter;
pub use storage::StorageAdapter;
