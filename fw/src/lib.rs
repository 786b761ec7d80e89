/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the emulated PRCMU firmware library.

--*/

mod firmware;

pub use crate::firmware::{OwnershipViolation, PrcmuFirmware};
