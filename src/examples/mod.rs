//! Concrete [`Air`](crate::air::Air) instances (§8). The wider specification
//! treats these as external collaborators behind the `Air` interface; this
//! module supplies one reference instance exercised by the integration test.

pub mod boundary;
