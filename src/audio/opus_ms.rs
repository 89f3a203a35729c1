//! Safe wrapper around libopus' multistream decoder.
//!
//! The `opus` crate only exposes mono/stereo decoders. Multi-microphone
//! streams are packed as several Opus streams in one packet, which needs the
//! multistream API. libopus itself is linked through the `opus` crate.

use std::ffi::{CStr, c_char, c_int};

// ======================== FFI declarations ========================

/// Opaque type for OpusMSDecoder
#[repr(C)]
pub struct OpusMSDecoder {
    _private: [u8; 0],
}

pub const OPUS_OK: c_int = 0;
pub const OPUS_ALLOC_FAIL: c_int = -7;

unsafe extern "C" {
    fn opus_multistream_decoder_create(
        fs: i32,
        channels: c_int,
        streams: c_int,
        coupled_streams: c_int,
        mapping: *const u8,
        error: *mut c_int,
    ) -> *mut OpusMSDecoder;
    fn opus_multistream_decode(
        st: *mut OpusMSDecoder,
        data: *const u8,
        len: i32,
        pcm: *mut i16,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int;
    fn opus_multistream_decoder_destroy(st: *mut OpusMSDecoder);
    fn opus_strerror(error: c_int) -> *const c_char;
}

/// Human readable libopus error string.
pub fn strerror(code: c_int) -> String {
    // SAFETY: opus_strerror returns a pointer to a static NUL-terminated string.
    unsafe {
        let ptr = opus_strerror(code);
        if ptr.is_null() {
            return format!("opus error {code}");
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

// ======================== Multistream decoder ========================

pub struct MsDecoder {
    state: *mut OpusMSDecoder,
    channels: usize,
}

// OpusMSDecoder is only used by the owning player, one call at a time
unsafe impl Send for MsDecoder {}

impl MsDecoder {
    /// Create a decoder with the identity channel mapping.
    ///
    /// Returns the libopus error code on failure.
    pub fn new(sample_rate: u32, channels: u8, streams: u8, coupled: u8) -> Result<Self, c_int> {
        let mapping: Vec<u8> = (0..channels).collect();
        let mut error: c_int = OPUS_OK;
        let state = unsafe {
            opus_multistream_decoder_create(
                sample_rate as i32,
                channels as c_int,
                streams as c_int,
                coupled as c_int,
                mapping.as_ptr(),
                &mut error,
            )
        };
        if error != OPUS_OK || state.is_null() {
            if !state.is_null() {
                unsafe { opus_multistream_decoder_destroy(state) };
            }
            return Err(if error == OPUS_OK { OPUS_ALLOC_FAIL } else { error });
        }
        Ok(Self {
            state,
            channels: channels as usize,
        })
    }

    /// Decode one packet into `pcm` (interleaved). Returns samples per channel.
    pub fn decode(&mut self, data: &[u8], pcm: &mut [i16]) -> Result<usize, c_int> {
        let frame_size = pcm.len() / self.channels;
        let result = unsafe {
            opus_multistream_decode(
                self.state,
                data.as_ptr(),
                data.len() as i32,
                pcm.as_mut_ptr(),
                frame_size as c_int,
                0,
            )
        };
        if result < 0 {
            Err(result)
        } else {
            Ok(result as usize)
        }
    }
}

impl Drop for MsDecoder {
    fn drop(&mut self) {
        unsafe { opus_multistream_decoder_destroy(self.state) };
    }
}
