pub struct Flag;
#[allow(dead_code)]
impl Flag {
    /// MY | MX | MV | ML | BGR
    pub const MADCTL_LANDSCAPE: u8 = 0xF8;
    /// MX | ML | BGR | MH
    pub const MADCTL_PORTRAIT: u8 = 0x5C;
    /// 18 bits per pixel on the MCU interface
    pub const PIXEL_FORMAT_18BIT: u8 = 0x66;
    /// SDO not used
    pub const INTERFACE_SDO_DISABLED: u8 = 0x80;
    pub const DISPLAY_INVERSION_2DOT: u8 = 0x02;
}
