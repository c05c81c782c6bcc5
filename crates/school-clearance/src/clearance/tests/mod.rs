mod common;

mod reporting;
