//! Application layer for Pictor.
//!
//! This crate provides the editing session use case, which owns all live
//! session state and mediates every state transition and the one external
//! service call.

pub mod editing_usecase;

pub use editing_usecase::{
    EDIT_FAILED_MESSAGE, EditingUseCase, NO_IMAGE_MESSAGE, PROMOTE_FAILED_MESSAGE,
};
