mod support;

mod unit_sqlite_repository;
