// Mon Oct 19 2026 - Alex

//! The handful of x86-64 encodings the timer call rewrite needs.

pub const NOP: u8 = 0x90;
pub const JMP_REL8: u8 = 0xeb;

/// `jo`..`ja` short conditional jumps: `0x70`..`0x77`.
pub const JCC_REL8_FAMILY: u8 = 0x70;
pub const JCC_REL8_MASK: u8 = 0xf8;

/// Value loaded into `%ecx` before the signal call.
pub const SIGNAL_CALL_FLAGS: u32 = 4;

pub struct InstructionEncoder;

impl InstructionEncoder {
    pub fn is_short_conditional_jump(opcode: u8) -> bool {
        opcode & JCC_REL8_MASK == JCC_REL8_FAMILY
    }

    pub fn encode_xor_edi_edi() -> [u8; 2] {
        [0x31, 0xff]
    }

    pub fn encode_xor_esi_esi() -> [u8; 2] {
        [0x31, 0xf6]
    }

    pub fn encode_mov_gs_rdx(disp: u32) -> [u8; 9] {
        let d = disp.to_le_bytes();
        [0x65, 0x48, 0x8b, 0x14, 0x25, d[0], d[1], d[2], d[3]]
    }

    pub fn encode_mov_ecx_imm(imm: u32) -> [u8; 5] {
        let i = imm.to_le_bytes();
        [0xb9, i[0], i[1], i[2], i[3]]
    }

    pub fn encode_mov_r8d_imm(imm: u32) -> [u8; 6] {
        let i = imm.to_le_bytes();
        [0x41, 0xb8, i[0], i[1], i[2], i[3]]
    }

    /// Argument setup for `psignal_internal(NULL, 0, current_thread(), 4, signal)`;
    /// the call itself follows the rewritten region unchanged.
    pub fn encode_signal_arguments(tls_offset: u32, signal: u8) -> Vec<u8> {
        let mut code = Vec::with_capacity(24);
        code.extend_from_slice(&Self::encode_xor_edi_edi());
        code.extend_from_slice(&Self::encode_xor_esi_esi());
        code.extend_from_slice(&Self::encode_mov_gs_rdx(tls_offset));
        code.extend_from_slice(&Self::encode_mov_ecx_imm(SIGNAL_CALL_FLAGS));
        code.extend_from_slice(&Self::encode_mov_r8d_imm(signal as u32));
        code
    }
}
