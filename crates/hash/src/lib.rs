// Copyright 2023-2025 Irreducible Inc.

pub mod hasher;
pub mod mimc;

pub use hasher::*;
pub use mimc::*;
