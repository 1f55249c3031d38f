/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_LEN: usize = 417;

/// A short, silent but well-formed MP3 stream
pub(crate) fn silent_mp3() -> Vec<u8> {
    let mut frame = vec![0u8; FRAME_LEN];
    frame[..4].copy_from_slice(&FRAME_HEADER);
    frame.repeat(10)
}
