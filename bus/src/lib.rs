/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the ux500 emulator bus library.

--*/

mod mmio;
mod ram;

pub use crate::mmio::{AccessSize, Mmio};
pub use crate::ram::{BusError, Ram};
