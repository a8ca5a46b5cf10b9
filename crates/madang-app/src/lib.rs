// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod debounce;
pub mod format;
pub mod forms;
pub mod ids;
pub mod list;
pub mod model;
pub mod page;
pub mod pagination;
pub mod query;
pub mod state;
pub mod view;

pub use controller::*;
pub use debounce::*;
pub use forms::*;
pub use ids::*;
pub use list::*;
pub use model::*;
pub use page::*;
pub use pagination::*;
pub use query::*;
pub use state::*;
pub use view::*;
