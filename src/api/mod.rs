// SPDX-License-Identifier: GPL-3.0-only
pub mod error;
pub mod handlers;
pub mod http;

pub use http::HttpServer;
