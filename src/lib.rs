//Greek characters appear throughout to match the mathematics
#![allow(confusable_idents)]
#![allow(mixed_script_confusables)]
#![allow(uncommon_codepoints)]

pub mod algebra;
pub mod qdldl;
pub mod solver;
