pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    pub const NOP: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const NORMAL_MODE_ON: u8 = 0x13;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
    pub const PAGE_ADDRESS_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_ACCESS_CTRL: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
    pub const INTERFACE_MODE_CTRL: u8 = 0xB0;
    pub const FRAME_RATE_CTRL: u8 = 0xB1;
    pub const INVERSION_CTRL: u8 = 0xB4;
    pub const DISPLAY_FUNCTION_CTRL: u8 = 0xB6;
    pub const POWER_CTRL1: u8 = 0xC0;
    pub const POWER_CTRL2: u8 = 0xC1;
    pub const VCOM_CTRL: u8 = 0xC5;
    pub const POSITIVE_GAMMA: u8 = 0xE0;
    pub const NEGATIVE_GAMMA: u8 = 0xE1;
    pub const SET_IMAGE_FUNCTION: u8 = 0xE9;
    pub const ADJUST_CTRL3: u8 = 0xF7;
}
