pub mod auto_archive;
