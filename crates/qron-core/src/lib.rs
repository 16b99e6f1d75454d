//! Core types and logic for the QRON storefront.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: `UserId`, `QronId`, `OrderId`, `FolderId`, `TagId`, ...
//! - **Tiers**: the ordered `Tier` enum and the single tier comparison
//! - **Catalog**: immutable mode / preset / plan tables
//! - **Profiles**: `Profile` with generation quota accounting
//! - **Entitlement**: the pure `check_entitlement` gate
//! - **Prompts**: deterministic prompt enhancement
//! - **Artifacts**: `Qron`, `Folder`, `Tag`, `Schedule`, `RedirectRule`
//! - **Orders**: durable purchase-intent records
//!
//! Everything here is pure and synchronous; orchestration of external
//! services lives in `qron-service`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod entitlement;
pub mod ids;
pub mod order;
pub mod organize;
pub mod profile;
pub mod prompt;
pub mod qron;
pub mod tier;

pub use catalog::{Catalog, Mode, Plan, Preset, FREE_PLAN_GENERATIONS, PRO_PLAN_GENERATIONS};
pub use entitlement::{check_entitlement, Denial, Grant};
pub use ids::{FolderId, IdError, OrderId, QronId, RuleId, ScheduleId, TagId, UserId};
pub use order::{Order, OrderStatus, PurchaseIntent};
pub use organize::{Folder, RedirectRule, RuleKind, Schedule, Tag, Transition};
pub use profile::Profile;
pub use prompt::enhance_prompt;
pub use qron::Qron;
pub use tier::{Tier, UnknownTier};
