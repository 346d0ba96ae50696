// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
mod models;
mod session;
mod state;
mod status;
mod submitter;
mod workflow;

pub use error::*;
pub use models::*;
pub use session::*;
pub use state::*;
pub use status::*;
pub use workflow::*;
