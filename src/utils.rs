pub mod nbt;
