//! Tag constants for resources created by the component
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `canary-component:managed-by` | Static identifier ("canary-component") |
//! | `canary-component:canary` | Name of the canary the resource serves |

/// Tag key identifying resources created by this component
pub const TAG_MANAGED_BY: &str = "canary-component:managed-by";

/// Tag value for [`TAG_MANAGED_BY`]
pub const TAG_MANAGED_BY_VALUE: &str = "canary-component";

/// Tag key holding the owning canary name
pub const TAG_CANARY: &str = "canary-component:canary";
