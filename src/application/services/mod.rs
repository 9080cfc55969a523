pub mod maintenance_loop;
