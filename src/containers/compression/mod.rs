pub mod lzss;
