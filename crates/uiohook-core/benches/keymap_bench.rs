//! Criterion benchmarks for key code translation tables.
//!
//! Both directions are first-match linear scans, so cost grows with a key's
//! position in the table.  These benches measure best and worst cases for the
//! Windows table, a bound X11 table, and the one-time XKB name binding.
//!
//! Run with:
//! ```bash
//! cargo bench --package uiohook-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uiohook_core::keymap::x11_xkb::{bind_key_names, KeyName, KEY_NAME_LENGTH, XKB_NAME_TABLE};
use uiohook_core::keymap::{KeyCodeTable, VirtualKeyCode};

// ── Representative key codes for benchmarking ─────────────────────────────────

/// A slice of Windows VK codes that map to common keys.
const BENCH_VK_CODES: &[u32] = &[
    0x41, // 'A'
    0x5A, // 'Z'
    0x0D, // VK_RETURN
    0x1B, // VK_ESCAPE
    0x08, // VK_BACK
    0x09, // VK_TAB
    0x20, // VK_SPACE
    0x70, // VK_F1
    0x7B, // VK_F12
    0x11, // VK_CONTROL
    0x10, // VK_SHIFT
    0x12, // VK_MENU (Alt)
    0x25, // VK_LEFT
    0x27, // VK_RIGHT
    0x26, // VK_UP
    0x28, // VK_DOWN
    0x31, // '1'
    0x30, // '0'
    0xFF, // No mapping
];

/// An evdev-like server description: keycode `8 + i` for the i-th name.
fn evdev_like_names() -> Vec<(u32, [u8; KEY_NAME_LENGTH])> {
    XKB_NAME_TABLE
        .iter()
        .enumerate()
        .map(|(i, row)| (8 + i as u32, row.name.0))
        .collect()
}

// ── Benchmarks: Windows VK translation ───────────────────────────────────────

fn bench_windows_vk_to_vcode(c: &mut Criterion) {
    let table = KeyCodeTable::windows();
    let mut group = c.benchmark_group("keymap_windows_vk");

    // Single lookup (typical per-event cost)
    group.bench_function("vk_to_vcode_single", |b| {
        b.iter(|| table.to_virtual(black_box(0x41), false))
    });

    // Batch of 19 diverse VK codes (simulates a burst of key events)
    group.bench_function("vk_to_vcode_batch_19", |b| {
        b.iter(|| {
            BENCH_VK_CODES
                .iter()
                .map(|&vk| table.to_virtual(black_box(vk), false))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

fn bench_vcode_to_windows_vk(c: &mut Criterion) {
    let table = KeyCodeTable::windows();
    let mut group = c.benchmark_group("keymap_windows_vk");

    // Best case near the top of the table, worst case a full miss.
    group.bench_with_input(
        BenchmarkId::new("vcode_to_vk", "Backspace"),
        &VirtualKeyCode::Backspace,
        |b, &vcode| b.iter(|| table.to_native(black_box(vcode))),
    );

    group.bench_with_input(
        BenchmarkId::new("vcode_to_vk", "Undefined"),
        &VirtualKeyCode::Undefined,
        |b, &vcode| b.iter(|| table.to_native(black_box(vcode))),
    );

    group.finish();
}

// ── Benchmarks: X11 ──────────────────────────────────────────────────────────

fn bench_x11_binding(c: &mut Criterion) {
    let names = evdev_like_names();
    let mut group = c.benchmark_group("keymap_x11");

    group.bench_function("bind_key_names_full_table", |b| {
        b.iter(|| bind_key_names(black_box(names.clone())))
    });

    let table = bind_key_names(names);
    group.bench_function("keycode_to_vcode_single", |b| {
        b.iter(|| table.to_virtual(black_box(38), false))
    });

    group.bench_function("name_match_single", |b| {
        let name = KeyName::new("AC01");
        b.iter(|| name.matches(black_box(&[b'A', b'C', b'0', b'1'])))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_windows_vk_to_vcode,
    bench_vcode_to_windows_vk,
    bench_x11_binding,
);
criterion_main!(benches);
