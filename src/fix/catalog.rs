// Mon Oct 19 2026 - Alex

//! Known kernel builds, in the order they are tried.
//!
//! The anchor is the body of `current_thread`, which yields the `%gs`
//! displacement of the thread pointer. The targets are the two timer blocks
//! in `bsd_ast` that either arm or clear the profiling timers before sending
//! SIGVTALRM (0x1a) or SIGPROF (0x1b) to the whole process. After the
//! rewrite the signal is sent to the current thread instead.

use crate::fix::{FixDescriptor, FixError};
use crate::pattern::compile;

const CURRENT_THREAD_LEAVE: &str = "
    0x55                                        //  0 push %rbp
    0x48 0x89 0xe5                              //  1 mov %rsp, %rbp
    0x65 0x48 0x8b 0x04 0x25                    //  4 mov %gs:tls, %rax
    *tls 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00
    0xc9                                        // 13 leave
    0xc3                                        // 14 ret
";

const CURRENT_THREAD_POP: &str = "
    0x55                                        //  0 push %rbp
    0x48 0x89 0xe5                              //  1 mov %rsp, %rbp
    0x65 0x48 0x8b 0x04 0x25                    //  4 mov %gs:tls, %rax
    *tls 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00
    0x5d                                        // 13 pop %rbp
    0xc3                                        // 14 ret
    0x90                                        // 15 nop
";

// Snow Leopard keeps the two timers in separately laid out blocks: the
// second one tests a 32-bit field through %r11d, one byte longer.
const BSD_AST_10_8_0_VTALRM: &str = "
    0x49 0x83 0xbc 0x24 0x00/0x0f 0x01 0x00 0x00 0x00   //  0 cmpq $0, 0x1b0(%r12)
    0x75 0x0c                                           //  9 jne 23
    0x41 0x8b 0x84 0x24 0x08/0x0f 0x01 0x00 0x00        // 11 mov 0x1b8(%r12), %eax
    0x85 0xc0                                           // 19 test %eax, %eax
    0x74 0x11                                           // 21 je 40
    *then_start 0x49 0x8b 0x7c 0x24 0x18                // 23 mov 0x18(%r12), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *then_end             // 28 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 33 call task_vtimer_set
    0xeb 0x0f                                           // 38 jmp 55
    *else_start 0x49 0x8b 0x7c 0x24 0x18                // 40 mov 0x18(%r12), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *else_end             // 45 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 50 call task_vtimer_clear
    *tail 0x41 0xb8 *signal 0x1a/0xfe 0x00 0x00 0x00    // 55 mov $sig, %r8d
    0x31 0xc9                                           // 61 xor %ecx, %ecx
    0x31 0xd2                                           // 63 xor %edx, %edx
    0x31 0xf6                                           // 65 xor %esi, %esi
    0x4c 0x89 0xe7 *end                                 // 67 mov %r12, %rdi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 70 call psignal_internal
";

const BSD_AST_10_8_0_PROF: &str = "
    0x49 0x83 0xbc 0x24 0x00/0x0f 0x01 0x00 0x00 0x00   //  0 cmpq $0, 0x1d0(%r12)
    0x75 0x0d                                           //  9 jne 24
    0x45 0x8b 0x9c 0x24 0x08/0x0f 0x01 0x00 0x00        // 11 mov 0x1d8(%r12), %r11d
    0x45 0x85 0xdb                                      // 19 test %r11d, %r11d
    0x74 0x11                                           // 22 je 41
    *then_start 0x49 0x8b 0x7c 0x24 0x18                // 24 mov 0x18(%r12), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *then_end             // 29 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 34 call task_vtimer_set
    0xeb 0x0f                                           // 39 jmp 56
    *else_start 0x49 0x8b 0x7c 0x24 0x18                // 41 mov 0x18(%r12), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *else_end             // 46 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 51 call task_vtimer_clear
    *tail 0x41 0xb8 *signal 0x1a/0xfe 0x00 0x00 0x00    // 56 mov $sig, %r8d
    0x31 0xc9                                           // 62 xor %ecx, %ecx
    0x31 0xd2                                           // 64 xor %edx, %edx
    0x31 0xf6                                           // 66 xor %esi, %esi
    0x4c 0x89 0xe7 *end                                 // 68 mov %r12, %rdi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 71 call psignal_internal
";

const BSD_AST_11_4_2: &str = "
    0x49 0x83 0xbe 0xc0/0xdf 0x01 0x00 0x00 0x00        //  0 cmpq $0, 0x1c0(%r14)
    0x75 0x0a                                           //  8 jne 20
    0x41 0x83 0xbe 0xc8/0xdf 0x01 0x00 0x00 0x00        // 10 cmpl $0, 0x1c8(%r14)
    0x74 0x10                                           // 18 je 36
    *then_start 0x49 0x8b 0x7e 0x18                     // 20 mov 0x18(%r14), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *then_end             // 24 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 29 call task_vtimer_set
    0xeb 0x0e                                           // 34 jmp 50
    *else_start 0x49 0x8b 0x7e 0x18                     // 36 mov 0x18(%r14), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *else_end             // 40 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 45 call task_vtimer_clear
    *tail 0x31 0xf6                                     // 50 xor %esi, %esi
    0x31 0xc9                                           // 52 xor %ecx, %ecx
    0x41 0xb8 *signal 0x1a/0xfe 0x00 0x00 0x00          // 54 mov $sig, %r8d
    0x4c 0x89 0xf7                                      // 60 mov %r14, %rdi
    0x31 0xd2 *end                                      // 63 xor %edx, %edx
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 65 call psignal_internal
";

const BSD_AST_12_4_0: &str = "
    0x49 0x83 0xbf 0xc0/0xdf 0x01 0x00 0x00 0x00        //  0 cmpq $0, 0x1c0(%r15)
    0x75 0x0a                                           //  8 jne 20
    0x41 0x83 0xbf 0xc8/0xdf 0x01 0x00 0x00 0x00        // 10 cmpl $0, 0x1c8(%r15)
    0x74 0x10                                           // 18 je 36
    *then_start 0x49 0x8b 0x7f 0x18                     // 20 mov 0x18(%r15), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *then_end             // 24 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 29 call task_vtimer_set
    0xeb 0x0e                                           // 34 jmp 50
    *else_start 0x49 0x8b 0x7f 0x18                     // 36 mov 0x18(%r15), %rdi
    0xbe 0x00/0xfc 0x00 0x00 0x00 *else_end             // 40 mov $timer, %esi
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 45 call task_vtimer_clear
    *tail 0x4c 0x89 0xff                                // 50 mov %r15, %rdi
    0x31 0xf6                                           // 53 xor %esi, %esi
    0x31 0xd2                                           // 55 xor %edx, %edx
    0x31 0xc9                                           // 57 xor %ecx, %ecx
    0x41 0xb8 *signal 0x1a/0xfe 0x00 0x00 0x00 *end     // 59 mov $sig, %r8d
    0xe8 0x00/0x00 0x00/0x00 0x00/0x00 0x00/0x00        // 65 call psignal_internal
";

pub fn builtin_fixes() -> Result<Vec<FixDescriptor>, FixError> {
    let leave = compile(CURRENT_THREAD_LEAVE)?.with_name("current_thread/leave");
    let pop = compile(CURRENT_THREAD_POP)?.with_name("current_thread/pop");

    Ok(vec![
        FixDescriptor::new(
            "10.8.0",
            leave,
            vec![
                compile(BSD_AST_10_8_0_VTALRM)?.with_name("bsd_ast/10.8.0/vtalrm"),
                compile(BSD_AST_10_8_0_PROF)?.with_name("bsd_ast/10.8.0/prof"),
            ],
        )?,
        FixDescriptor::new(
            "11.4.2",
            pop.clone(),
            vec![compile(BSD_AST_11_4_2)?.with_name("bsd_ast/11.4.2")],
        )?,
        FixDescriptor::new(
            "12.4.0",
            pop,
            vec![compile(BSD_AST_12_4_0)?.with_name("bsd_ast/12.4.0")],
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::descriptor::tests::{anchor_bytes, target_bytes};
    use crate::fix::generator::SiteLayout;
    use crate::fix::{fix_any_version, Fix};

    #[test]
    fn test_builtin_fixes_compile_in_priority_order() {
        let fixes = builtin_fixes().unwrap();
        let versions: Vec<&str> = fixes.iter().map(|f| f.version()).collect();

        assert_eq!(versions, vec!["10.8.0", "11.4.2", "12.4.0"]);
        assert_eq!(fixes[0].targets().len(), 2);
        assert_eq!(fixes[0].anchor().len(), 15);
        assert_eq!(fixes[1].anchor().len(), 16);
    }

    #[test]
    fn test_builtin_layouts() {
        let fixes = builtin_fixes().unwrap();
        let ends: Vec<(usize, usize)> = fixes.iter()
            .flat_map(|f| f.targets().iter())
            .map(|p| {
                let layout = SiteLayout::from_pattern(p).unwrap();
                (layout.arm_len(), layout.end)
            })
            .collect();

        assert_eq!(ends, vec![(10, 70), (10, 71), (9, 65), (9, 65)]);
    }

    #[test]
    fn test_mountain_lion_kernel_selects_12_4_0() {
        let fixes = builtin_fixes().unwrap();
        let mut target = target_bytes();

        let applied = fix_any_version(&fixes, &anchor_bytes(0x08), &mut target).unwrap();

        assert_eq!(applied.version, "12.4.0");
        assert_eq!(applied.skipped.len(), 2);
        assert_eq!(applied.skipped[0].error, FixError::AnchorMismatch);
        assert_eq!(applied.skipped[1].error, FixError::NoTargetMatch);
    }

    #[test]
    fn test_lion_kernel_selects_11_4_2() {
        let site: Vec<u8> = vec![
            0x49, 0x83, 0xbe, 0xc0, 0x01, 0x00, 0x00, 0x00,
            0x75, 0x0a,
            0x41, 0x83, 0xbe, 0xc8, 0x01, 0x00, 0x00, 0x00,
            0x74, 0x10,
            0x49, 0x8b, 0x7e, 0x18,
            0xbe, 0x02, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x01, 0x00, 0x00,
            0xeb, 0x0e,
            0x49, 0x8b, 0x7e, 0x18,
            0xbe, 0x02, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x02, 0x00, 0x00,
            0x31, 0xf6,
            0x31, 0xc9,
            0x41, 0xb8, 0x1b, 0x00, 0x00, 0x00,
            0x4c, 0x89, 0xf7,
            0x31, 0xd2,
            0xe8, 0x00, 0x03, 0x00, 0x00,
        ];
        let mut target = site.clone();
        target.extend_from_slice(&[0x90, 0x90]);
        target.extend_from_slice(&site);
        let original = target.clone();

        let fixes = builtin_fixes().unwrap();
        let applied = fix_any_version(&fixes, &anchor_bytes(0x08), &mut target).unwrap();

        assert_eq!(applied.version, "11.4.2");
        assert_eq!(applied.report.sites, vec![0, 72]);
        assert_eq!(target.len(), original.len());
        // the 11.4.2 rewrite fills its 65-byte budget exactly
        assert_eq!(&target[59..65], &[0x41, 0xb8, 0x1b, 0x00, 0x00, 0x00]);
        assert_eq!(&target[65..72], &original[65..72]);
    }

    fn snow_leopard_vtalrm() -> Vec<u8> {
        vec![
            0x49, 0x83, 0xbc, 0x24, 0xb0, 0x01, 0x00, 0x00, 0x00,
            0x75, 0x0c,
            0x41, 0x8b, 0x84, 0x24, 0xb8, 0x01, 0x00, 0x00,
            0x85, 0xc0,
            0x74, 0x11,
            0x49, 0x8b, 0x7c, 0x24, 0x18,
            0xbe, 0x02, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x01, 0x00, 0x00,
            0xeb, 0x0f,
            0x49, 0x8b, 0x7c, 0x24, 0x18,
            0xbe, 0x02, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x10, 0x00, 0x00,
            0x41, 0xb8, 0x1a, 0x00, 0x00, 0x00,
            0x31, 0xc9,
            0x31, 0xd2,
            0x31, 0xf6,
            0x4c, 0x89, 0xe7,
            0xe8, 0x00, 0x20, 0x00, 0x00,
        ]
    }

    fn snow_leopard_prof() -> Vec<u8> {
        vec![
            0x49, 0x83, 0xbc, 0x24, 0xd0, 0x01, 0x00, 0x00, 0x00,
            0x75, 0x0d,
            0x45, 0x8b, 0x9c, 0x24, 0xd8, 0x01, 0x00, 0x00,
            0x45, 0x85, 0xdb,
            0x74, 0x11,
            0x49, 0x8b, 0x7c, 0x24, 0x18,
            0xbe, 0x01, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x01, 0x00, 0x00,
            0xeb, 0x0f,
            0x49, 0x8b, 0x7c, 0x24, 0x18,
            0xbe, 0x01, 0x00, 0x00, 0x00,
            0xe8, 0x00, 0x10, 0x00, 0x00,
            0x41, 0xb8, 0x1b, 0x00, 0x00, 0x00,
            0x31, 0xc9,
            0x31, 0xd2,
            0x31, 0xf6,
            0x4c, 0x89, 0xe7,
            0xe8, 0x00, 0x20, 0x00, 0x00,
        ]
    }

    #[test]
    fn test_snow_leopard_kernel_selects_10_8_0() {
        let mut anchor = vec![0x55, 0x48, 0x89, 0xe5, 0x65, 0x48, 0x8b, 0x04, 0x25];
        anchor.extend_from_slice(&0x10u32.to_le_bytes());
        anchor.extend_from_slice(&[0xc9, 0xc3]);

        let vtalrm = snow_leopard_vtalrm();
        let prof = snow_leopard_prof();
        assert_eq!((vtalrm.len(), prof.len()), (75, 76));

        let mut target = vtalrm.clone();
        target.extend_from_slice(&[0x48, 0x85, 0xc0]);
        target.extend_from_slice(&prof);
        let original = target.clone();

        let fixes = builtin_fixes().unwrap();
        let applied = fix_any_version(&fixes, &anchor, &mut target).unwrap();

        assert_eq!(applied.version, "10.8.0");
        assert!(applied.skipped.is_empty());
        assert_eq!(applied.report.sites, vec![0, 78]);
        assert_eq!(applied.report.tls_offset, 0x10);
        assert_eq!(target.len(), original.len());

        let inject = |signal: u8| -> Vec<u8> {
            vec![
                0x31, 0xff, 0x31, 0xf6,
                0x65, 0x48, 0x8b, 0x14, 0x25, 0x10, 0x00, 0x00, 0x00,
                0xb9, 0x04, 0x00, 0x00, 0x00,
                0x41, 0xb8, signal, 0x00, 0x00, 0x00,
            ]
        };

        // vtalrm: arm hoisted, je and jmp shortened by the 10-byte arm
        let site = &target[..75];
        assert_eq!(&site[..10], &vtalrm[23..33]);
        assert_eq!(&site[10..32], &vtalrm[..22]);
        assert_eq!(site[32], 0x07);
        assert_eq!(&site[33..38], &vtalrm[33..38]);
        assert_eq!(site[39], 0x05);
        assert_eq!(&site[40..45], &[0xe8, 0x0a, 0x10, 0x00, 0x00]);
        assert_eq!(&site[45..69], &inject(0x1a)[..]);
        assert_eq!(site[69], 0x90);
        assert_eq!(&site[70..75], &vtalrm[70..75]);
        assert_eq!(&target[75..78], &original[75..78]);

        // prof: same shape, one byte longer budget
        let site = &target[78..];
        assert_eq!(&site[..10], &prof[24..34]);
        assert_eq!(site[33], 0x07);
        assert_eq!(site[40], 0x05);
        assert_eq!(&site[41..46], &[0xe8, 0x0a, 0x10, 0x00, 0x00]);
        assert_eq!(&site[46..70], &inject(0x1b)[..]);
        assert_eq!(site[70], 0x90);
        assert_eq!(&site[71..76], &prof[71..76]);
    }
}
