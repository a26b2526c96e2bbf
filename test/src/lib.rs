//! # Entsync Test
//! Integration test suite driving a server and one or more clients
//! over an in-process loopback transport.
