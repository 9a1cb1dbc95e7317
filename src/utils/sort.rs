/// Sort column indices ascending and carry their values along.
///
/// LSD radix sort over the four key bytes. All byte histograms are built in
/// one scan, and a byte that is identical for every key is skipped, so
/// vocabularies under 65536 columns cost two passes at most.
/// Stable: equal columns keep their input order.
pub fn radix_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    debug_assert_eq!(inds.len(), vals.len());
    let len = inds.len().min(vals.len());
    if len < 2 {
        return;
    }
    if len <= 32 {
        insertion_sort(&mut inds[..len], &mut vals[..len]);
        return;
    }

    let mut hist = [[0usize; 256]; 4];
    for &key in inds.iter() {
        for (byte, counts) in hist.iter_mut().enumerate() {
            counts[digit(key, byte)] += 1;
        }
    }

    let mut keys_buf = inds.to_vec();
    let mut vals_buf = vals.to_vec();
    // true while the current order lives in the scratch buffers
    let mut in_buf = false;

    for (byte, counts) in hist.iter().enumerate() {
        if counts.iter().any(|&c| c == len) {
            continue;
        }
        let mut offsets = [0usize; 256];
        let mut next = 0;
        for (offset, &count) in offsets.iter_mut().zip(counts.iter()) {
            *offset = next;
            next += count;
        }

        let (src_keys, src_vals, dst_keys, dst_vals): (&[u32], &[N], &mut [u32], &mut [N]) = if in_buf {
            (keys_buf.as_slice(), vals_buf.as_slice(), &mut *inds, &mut *vals)
        } else {
            (&*inds, &*vals, keys_buf.as_mut_slice(), vals_buf.as_mut_slice())
        };
        for (&key, &val) in src_keys.iter().zip(src_vals) {
            let slot = &mut offsets[digit(key, byte)];
            dst_keys[*slot] = key;
            dst_vals[*slot] = val;
            *slot += 1;
        }
        in_buf = !in_buf;
    }

    if in_buf {
        inds.copy_from_slice(&keys_buf);
        vals.copy_from_slice(&vals_buf);
    }
}

#[inline]
fn digit(key: u32, byte: usize) -> usize {
    ((key >> (byte * 8)) & 0xFF) as usize
}

fn insertion_sort<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    for i in 1..inds.len() {
        let mut j = i;
        while j > 0 && inds[j - 1] > inds[j] {
            inds.swap(j - 1, j);
            vals.swap(j - 1, j);
            j -= 1;
        }
    }
}
