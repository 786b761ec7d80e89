/*++

Licensed under the Apache-2.0 license.

File Name:

    mmio.rs

Abstract:

    File contains the host-side view of device memory.

--*/

/// Width of a single device-memory access.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum AccessSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

/// A host-side window onto device memory.
///
/// Unlike an emulator-internal bus, implementations must be shareable
/// across threads: the driver issues accesses concurrently from caller
/// context, its interrupt entry point, and its worker thread. Interior
/// mutability (and its locking) is the implementation's concern.
///
/// Device windows are always mapped, so accesses are infallible from the
/// driver's point of view; an implementation that is handed an address
/// outside its windows has hit a harness bug and may panic.
pub trait Mmio: Send + Sync {
    /// Read a value of the given size from the device address `addr`.
    fn read(&self, size: AccessSize, addr: u32) -> u32;

    /// Write a value of the given size to the device address `addr`.
    fn write(&self, size: AccessSize, addr: u32, val: u32);
}
