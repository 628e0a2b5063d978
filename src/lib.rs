pub mod pxml;
