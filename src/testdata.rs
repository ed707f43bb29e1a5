// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Fixed inputs for reproducible recovery trials.

pub mod trial {
    /// Seeds for `Lfsr113::seed_from_u64`, run before any random seeds.
    pub const STATIC_TEST_SEEDS: [u64; 8] = [
        0x0000000000000000,
        0x0000000000000001,
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xffffffffffffffff,
        0x0123456789abcdef,
        0xdeadbeefcafebabe,
    ];

    /// Port ranges exercised by the trial suite: Linux default, IANA dynamic ports, everything.
    pub const PORT_RANGES: [(u32, u32); 3] = [(32768, 60999), (49152, 65535), (0, 65535)];
}
