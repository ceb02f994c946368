mod fixtures;
mod pager_tests;
