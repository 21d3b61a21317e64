#![allow(dead_code)]

pub mod gateways;
