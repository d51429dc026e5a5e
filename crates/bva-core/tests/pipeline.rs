//! End-to-end pipeline tests on hand-built photon streams.

use bva_common::{BurstId, Error, PhotonRecord, StreamLabel};
use bva_config::{get_preset, AnalysisConfig, BoundaryPolicy, PresetName};
use bva_core::aggregate::SENTINEL;
use bva_core::analysis::{analyze, binned_bva, per_burst_bva, AnalysisParams};
use bva_core::binning::BinEdges;
use bva_core::input::{parse_bytes, InputFormat};
use bva_core::stream::PhotonStream;
use StreamLabel::{AexAem as X, DexAem as A, DexDem as D};

fn stream(bursts: Vec<(u64, Vec<StreamLabel>)>) -> PhotonStream {
    PhotonStream::from_bursts(bursts.into_iter().map(|(id, l)| (BurstId(id), l)))
        .expect("valid bursts")
}

fn params(edges: &[f64], n: usize, t: u64) -> AnalysisParams {
    AnalysisParams::new(n, BinEdges::new(edges.to_vec()).expect("edges"), t).expect("params")
}

#[test]
fn two_burst_example() {
    let s = stream(vec![(0, vec![A, A, D, D]), (1, vec![D, D])]);
    let p = params(&[0.0, 0.5, 1.0], 2, 0);

    let out = analyze(&s, &p).unwrap();
    assert_eq!(out.bursts[0].raw_efficiency, 0.5);
    assert_eq!(out.bursts[0].bva, 0.5);
    assert_eq!(out.bursts[0].bin, Some(1));
    assert_eq!(out.bursts[1].raw_efficiency, 0.0);
    assert_eq!(out.bursts[1].bva, 0.0);
    assert_eq!(out.bursts[1].bin, Some(0));

    let curve = binned_bva(&s, &p).unwrap();
    assert_eq!(curve.pairs(), vec![(0.25, 0.0), (0.75, 0.5)]);
}

#[test]
fn trailing_window_keeps_fixed_denominator() {
    // windows [A,A,D] and [A]: ratios 2/3 and 1/3
    let s = stream(vec![(0, vec![A, A, D, A])]);
    let out = per_burst_bva(&s, 3, A).unwrap();
    assert_eq!(out[0].num_sub_bursts, 2);
    let expected = 1.0f64 / 6.0;
    assert!((out[0].bva - expected).abs() < 1e-12);
}

#[test]
fn single_window_burst_has_zero_dispersion() {
    let s = stream(vec![(0, vec![A, D, A])]);
    let out = per_burst_bva(&s, 7, A).unwrap();
    assert_eq!(out[0].num_sub_bursts, 1);
    assert_eq!(out[0].bva, 0.0);
}

#[test]
fn non_acceptor_labels_count_in_denominator() {
    // acceptor-excitation photons still occupy window slots
    let s = stream(vec![(0, vec![A, X, X, X])]);
    let out = per_burst_bva(&s, 4, A).unwrap();
    assert_eq!(out[0].raw_efficiency, 0.25);
}

#[test]
fn sparse_bins_report_sentinel() {
    let s = stream(vec![(0, vec![A, D, A, D]), (1, vec![A, A, A, D])]);
    let p = params(&[0.0, 0.5, 1.0], 2, 3);
    let out = analyze(&s, &p).unwrap();

    // bin 0 is empty, bin 1 has 4 sub-bursts from 2 bursts
    assert_eq!(out.pooled.points[0].value, SENTINEL);
    assert!(out.pooled.points[1].reported);
    // burst-mean curve gates on 2 bursts, not above 3
    assert_eq!(out.burst_mean.points[1].value, SENTINEL);
}

#[test]
fn raising_threshold_never_reveals_bins() {
    let bursts = (0..30u64)
        .map(|i| {
            let labels = (0..(3 + i % 11))
                .map(|k| if (k + i) % 4 == 0 { A } else { D })
                .collect();
            (i, labels)
        })
        .collect();
    let s = stream(bursts);
    let edges = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

    let mut previous: Option<Vec<bool>> = None;
    for t in [0, 1, 5, 10, 40, 1000] {
        let curve = binned_bva(&s, &params(&edges, 3, t)).unwrap();
        let reported: Vec<bool> = curve.points.iter().map(|p| p.reported).collect();
        if let Some(prev) = &previous {
            for (before, now) in prev.iter().zip(&reported) {
                assert!(*before || !*now, "bin appeared when threshold rose to {t}");
            }
        }
        previous = Some(reported);
    }
}

#[test]
fn boundary_policies() {
    let s = stream(vec![(0, vec![A, A]), (1, vec![D, A])]);
    let edges = [0.0, 0.25, 0.75];

    let exclude = analyze(&s, &params(&edges, 1, 0)).unwrap();
    assert_eq!(exclude.excluded_bursts, 1);
    assert_eq!(exclude.bursts[0].bin, None);
    assert_eq!(exclude.bursts[1].bin, Some(1));

    let clamp = analyze(
        &s,
        &params(&edges, 1, 0).with_boundary_policy(BoundaryPolicy::Clamp),
    )
    .unwrap();
    assert_eq!(clamp.excluded_bursts, 0);
    assert_eq!(clamp.bursts[0].bin, Some(1));
    assert_eq!(clamp.pooled.points[1].num_bursts, 2);

    let strict = analyze(
        &s,
        &params(&edges, 1, 0).with_boundary_policy(BoundaryPolicy::Strict),
    );
    assert!(matches!(
        strict,
        Err(Error::OutOfRangeEfficiency { burst: BurstId(0), .. })
    ));
}

#[test]
fn upper_domain_edge_lands_in_last_bin() {
    let s = stream(vec![(0, vec![A, A, A])]);
    let p = AnalysisParams::from_config(&AnalysisConfig::default()).unwrap();
    let out = analyze(&s, &p).unwrap();
    assert_eq!(out.bursts[0].bin, Some(19));
    assert_eq!(out.excluded_bursts, 0);
}

#[test]
fn presets_produce_consistent_bins() {
    let s = stream(vec![(0, vec![A, D, D, D, A, D, D, D, D, D])]);
    for &name in PresetName::ALL {
        let p = AnalysisParams::from_config(&get_preset(name)).unwrap();
        let out = analyze(&s, &p).unwrap();
        let bin = out.bursts[0].bin.expect("E = 0.2 is inside every preset");
        let (lo, hi) = p.edges.bounds(bin);
        assert!(lo <= 0.2 && 0.2 < hi, "{name}: 0.2 not in [{lo}, {hi})");
    }
}

#[test]
fn csv_to_curve() {
    let csv = "\
burst,ph,stream
7,0,DexAem
7,1,DexAem
7,2,DexDem
7,3,DexDem
2,0,DexDem
2,1,DexDem
";
    let records = parse_bytes(csv.as_bytes(), InputFormat::Csv).unwrap();
    let s = PhotonStream::from_records(records).unwrap();
    assert_eq!(s.burst_ids().collect::<Vec<_>>(), vec![BurstId(2), BurstId(7)]);

    let out = analyze(&s, &params(&[0.0, 0.5, 1.0], 2, 0)).unwrap();
    assert_eq!(out.bursts[0].burst, BurstId(2));
    assert_eq!(out.pooled.values(), vec![0.0, 0.5]);
}

#[test]
fn out_of_order_photon_is_malformed() {
    let records = vec![
        PhotonRecord::new(0u64, 0, A),
        PhotonRecord::new(0u64, 2, D),
    ];
    match PhotonStream::from_records(records) {
        Err(Error::MalformedBurst { burst, reason }) => {
            assert_eq!(burst, BurstId(0));
            assert!(reason.contains("expected photon 1"));
        }
        other => panic!("expected malformed burst, got {other:?}"),
    }
}
