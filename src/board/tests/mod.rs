//! Board-level test suites: perft counts and randomized properties.

mod properties;
