use std::convert::Infallible;

use bencher::{benchmark_group, benchmark_main, Bencher};
use rxcore::prelude::*;

fn iterate_1k_on_the_trampoline(b: &mut Bencher) {
  b.iter(|| {
    let count = MutArc::own(0u32);
    let sink = count.clone();
    from_iter::<_, Infallible>(0..1_000u32).subscribe(move |_| *sink.rc_deref_mut() += 1);
    assert_eq!(*count.rc_deref(), 1_000);
  })
}

fn concat_100_single_element_sources(b: &mut Bencher) {
  b.iter(|| {
    let count = MutArc::own(0u32);
    let sink = count.clone();
    concat((0..100u32).map(|v| of::<_, Infallible>(v)))
      .subscribe(move |_| *sink.rc_deref_mut() += 1);
    assert_eq!(*count.rc_deref(), 100);
  })
}

benchmark_group!(
  benches,
  iterate_1k_on_the_trampoline,
  concat_100_single_element_sources
);
benchmark_main!(benches);
