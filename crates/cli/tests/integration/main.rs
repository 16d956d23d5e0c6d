mod common;
mod init_tests;
mod outputs_tests;
mod plan_tests;
mod site_tests;
mod synth_tests;
