#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

pub mod bbsplus;
pub mod bls;
pub mod errors;
pub mod utils;
