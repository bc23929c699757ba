#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware;

// The firmware image only exists for the target; host builds get a stub so
// the library tests still link and run.
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {}
