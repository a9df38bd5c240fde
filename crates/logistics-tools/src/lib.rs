//! Production logistics tools
//!
//! Seven tools an orchestrator can invoke on behalf of a production
//! assistant agent:
//! - scene schedule lookup (Notion)
//! - inventory search, availability check and reservation (Airtable, Notion)
//! - briefings and approval requests (Slack)
//! - mock order placement
//!
//! ```no_run
//! use logistics_core::{Connections, ToolContext, ToolInvocation};
//! use logistics_tools::workshop_registry;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = workshop_registry();
//! let ctx = ToolContext::new(Arc::new(Connections::from_env()));
//! let result = registry
//!     .invoke(
//!         ToolInvocation::new("search_inventory", serde_json::json!({ "query": "Canon" })),
//!         ctx,
//!     )
//!     .await?;
//! println!("{:?}", result.as_json());
//! # Ok(())
//! # }
//! ```

pub mod comms;
pub mod data;

pub use comms::{
    create_communication_tools, PlaceOrderTool, PostBriefingTool, SendApprovalRequestTool,
};
pub use data::{
    create_data_tools, CheckAvailabilityTool, CreateReservationTool, GetScheduleTool,
    SearchInventoryTool,
};

use logistics_core::{ToolBox, ToolRegistry};

/// All seven workshop tools
pub fn create_workshop_tools() -> Vec<ToolBox> {
    let mut tools = create_data_tools();
    tools.extend(create_communication_tools());
    tools
}

/// A registry with every workshop tool registered by name
pub fn workshop_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_all(create_workshop_tools());
    registry
}
