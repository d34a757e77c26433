// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions. Each accepts `&Database` and runs on the writer thread.

pub mod complaints;
pub mod messages;
pub mod users;
