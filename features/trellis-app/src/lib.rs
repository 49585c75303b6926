//! Trellis App - application assembly on top of `trellis-di` and
//! `trellis-sequence`.
//!
//! An [Application] owns the root context. Components mount into it as
//! units (controllers, providers, optionally repositories through the
//! explicit [RepositoryMountHook] extension), servers own child contexts,
//! and startup validates the whole binding graph before anything runs.
//!
//! Trellis App consists of the following components:
//!
//! 1. Application - root context, controller registry, servers, mount hooks
//! 2. Component - the mountable bundle contract and its capability traits
//! 3. Server - the start/stop contract and the in-process reference server
//! 4. StopSignal - the cooperative stop signal servers hand to their work

pub mod application;
pub mod component;
pub mod errors;
pub mod server;
pub mod signal;

pub use application::Application;
pub use component::{
    Component, ContributesRepositories, ControllerRegistration, MountHook, RepositoryMountHook,
};
pub use errors::{LifecycleError, MountError};
pub use server::{InProcessServer, Server};
pub use signal::{StopHandle, StopSignal};
