use std::io::Cursor;

use bstr::B;

use splicegraph::{
    codec::{decode, encode, read_genes, write_genes, GeneReader},
    config::FilterConfig,
    exon::{ExonId, Strand, NO_RESIDUE},
    filter::IntervalFilter,
    genegraph::{Exon, Gene},
    interval::io::{read_records, write_records},
    linker::GraphLinker,
    matcher::PathMatcher,
    reverse::{reverse, reverse_stream},
    util::validate::validate,
};

fn hnd(x: usize) -> ExonId {
    ExonId(x)
}

fn build_gene(
    exons: &[(i32, i32, &str)],
    links: &[(usize, usize, i32, u8)],
) -> Gene {
    let mut gene = Gene::new(b"TestGene", 1, Strand::Forward);
    for &(start, end, seq) in exons.iter() {
        gene.append_exon(Exon::new(start, end).with_sequence(B(seq)));
    }
    for &(from, to, weight, residue) in links.iter() {
        assert!(gene.create_link(hnd(from), hnd(to), weight, residue));
    }
    gene
}

#[test]
fn match_single_exon() {
    let gene = build_gene(&[(10, 25, "ABCDE")], &[]);
    let found = PathMatcher::new().find(&gene, b"ABCDE");
    assert_eq!(found.matched, 5);
    assert_eq!(found.trail, vec![hnd(0)]);
    assert!(found.exhaustive);
}

#[test]
fn match_across_junction() {
    let gene =
        build_gene(&[(1, 500, "AB"), (600, 900, "CDE")], &[(0, 1, 5, NO_RESIDUE)]);
    let found = PathMatcher::new().find(&gene, b"ABCDE");
    assert_eq!(found.matched, 5);
    assert_eq!(found.trail, vec![hnd(0), hnd(1)]);
    assert_eq!(found.genomic_span(&gene), Some((1, 900)));
}

#[test]
fn match_bridging_residue() {
    let gene = build_gene(&[(1, 500, "AB"), (600, 900, "CDE")], &[(0, 1, 5, b'X')]);
    let matcher = PathMatcher::new();

    let bridged = matcher.find(&gene, b"ABXCDE");
    assert_eq!(bridged.matched, 6);
    assert_eq!(bridged.trail, vec![hnd(0), hnd(1)]);

    let unbridged = matcher.find(&gene, b"ABCDE");
    assert_eq!(unbridged.matched, 2);
    assert_eq!(unbridged.trail, vec![hnd(0)]);
}

// Forward strand predictions, with one line of each kind the filter
// drops. Coordinates are 1-based and inclusive.
const PREDICTIONS: &str = "\
# seqname\tsource\tfeature\tstart\tend\tscore\tstrand\tframe
chr1\tgeneid\tFirst\t101\t160\t5.0\t+\t0
chr1\tgeneid\tInternal\t301\t361\t4.0\t+\t0
chr1\tgeneid\tInternal\t401\t459\t3.0\t+\t0
chr1\tgeneid\tTerminal\t601\t660\t2.5\t+\t2
chr1\tgeneid\tSingle\t30001\t30060\t1.0\t+\t0
chr1\tgeneid\tInternal\t701\t760\t-5.0\t+\t0
chr1\tgeneid\tInternal\t801\t860\t4.0\t-\t0
chr1\tgeneid\tPromoter\t50\t90\t4.0\t+\t0

chr1\tgeneid\tInternal\tnot-a-number\t90\t4.0\t+\t0
";

fn genome() -> Vec<u8> {
    let mut seq = vec![b'N'; 31_000];
    seq[100..160].copy_from_slice(&[b'C'; 60]);
    seq[300..361].copy_from_slice(&[b'G'; 61]);
    seq[400..459].copy_from_slice(&[b'T'; 59]);
    seq[600..660].copy_from_slice(&[b'A'; 60]);
    seq
}

fn pipeline_genes() -> Vec<Gene> {
    let mut filter = IntervalFilter::new(&FilterConfig::default(), Strand::Forward);
    let stats = filter.read_lines(Cursor::new(PREDICTIONS)).unwrap();
    assert_eq!(stats.lines, 9);
    assert_eq!(stats.accepted, 5);
    assert_eq!(stats.below_cutoff, 1);
    assert_eq!(stats.wrong_strand, 1);
    assert_eq!(stats.unknown_feature, 1);
    assert_eq!(stats.malformed, 1);

    let linker = GraphLinker::default();
    let linked = linker.link(filter.into_sorted(), Strand::Forward);
    assert_eq!(linked.len(), 5);
    linked.genes(1, &genome())
}

#[test]
fn predictions_become_genes() {
    let genes = pipeline_genes();
    assert_eq!(genes.len(), 2);
    assert_eq!(genes[0].name, b"1+.0".to_vec());
    assert_eq!(genes[1].name, b"1+.1".to_vec());

    let gene = &genes[0];
    assert_eq!(gene.exon_count(), 4);
    assert_eq!(gene.span(), Some((100, 660)));

    // the second internal exon ends one base into a codon, which only
    // the terminal exon can complete
    assert!(gene.has_link(hnd(0), hnd(1)));
    assert!(gene.has_link(hnd(0), hnd(2)));
    assert!(gene.has_link(hnd(1), hnd(3)));
    assert!(!gene.has_link(hnd(1), hnd(2)));
    assert!(!gene.has_link(hnd(2), hnd(3)));
    assert!(!gene.has_link(hnd(0), hnd(3)));
    assert_eq!(gene.link_count(), 3);

    let exon = gene.exon_unchecked(hnd(0));
    assert_eq!(exon.sequence, vec![b'C'; 60]);
    assert_eq!(exon.prefix, *b"NN");
    assert_eq!(exon.suffix, *b"NN");

    let single = &genes[1];
    assert_eq!(single.exon_count(), 1);
    assert_eq!(single.link_count(), 0);

    for gene in genes.iter() {
        assert_eq!(validate(gene, Some(10)), Ok(()));
    }
}

#[test]
fn pipeline_round_trip() {
    let genes = pipeline_genes();

    for gene in genes.iter() {
        let bytes = encode(gene).unwrap();
        assert_eq!(&decode(&bytes).unwrap(), gene);
    }

    let mut stream = Vec::new();
    assert_eq!(write_genes(&genes, &mut stream).unwrap(), 2);
    let mut reader = GeneReader::new(stream.as_slice());
    let first = reader.next().unwrap().unwrap();
    assert_eq!(first, genes[0]);
    assert_eq!(reader.genes_read(), 1);
    let rest: Vec<Gene> = reader.map(|g| g.unwrap()).collect();
    assert_eq!(rest, vec![genes[1].clone()]);

    assert_eq!(read_genes(stream.as_slice()).unwrap(), genes);
}

#[test]
fn pipeline_matching() {
    let genes = pipeline_genes();
    let gene = &genes[0];
    let matcher = PathMatcher::new();

    let mut query = b"CCC".to_vec();
    query.extend_from_slice(&[b'G'; 61]);
    query.extend_from_slice(b"AAA");
    let found = matcher.find(gene, &query);
    assert!(found.is_complete(&query));
    assert_eq!(found.trail, vec![hnd(0), hnd(1), hnd(3)]);
    assert_eq!(found.genomic_span(gene), Some((100, 660)));

    // the third exon is a dead end
    let mut query = b"CCC".to_vec();
    query.extend_from_slice(&[b'T'; 59]);
    query.extend_from_slice(b"AA");
    let found = matcher.find(gene, &query);
    assert_eq!(found.matched, 62);
    assert_eq!(found.trail, vec![hnd(0), hnd(2)]);
}

#[test]
fn decoy_genes() {
    let genes = pipeline_genes();
    let gene = &genes[0];

    let decoy = reverse(gene);
    assert_eq!(decoy.strand, Strand::Reverse);
    assert_eq!(decoy.exon_count(), 4);
    assert_eq!(validate(&decoy, Some(10)), Ok(()));
    assert_eq!(&reverse(&decoy), gene);

    // the path 0 -> 1 -> 3, read backwards
    let mut query = b"AAA".to_vec();
    query.extend_from_slice(&[b'G'; 61]);
    query.extend_from_slice(b"CCC");
    let found = PathMatcher::new().find(&decoy, &query);
    assert!(found.is_complete(&query));
    assert_eq!(found.trail, vec![hnd(0), hnd(2), hnd(3)]);

    let mut stream = Vec::new();
    write_genes(&genes, &mut stream).unwrap();
    let mut decoys = Vec::new();
    assert_eq!(reverse_stream(stream.as_slice(), &mut decoys).unwrap(), 2);
    let read = read_genes(decoys.as_slice()).unwrap();
    assert_eq!(read[0], decoy);
}

#[test]
fn linked_intervals_file() {
    let mut filter = IntervalFilter::new(&FilterConfig::default(), Strand::Forward);
    filter.read_lines(Cursor::new(PREDICTIONS)).unwrap();
    let linked = GraphLinker::default().link(filter.into_sorted(), Strand::Forward);

    let records = linked.records();
    let mut bytes = Vec::new();
    write_records(&records, &mut bytes).unwrap();
    let read = read_records(bytes.as_slice()).unwrap();

    assert_eq!(read.len(), 5);
    for (record, interval) in read.iter().zip(linked.intervals()) {
        assert_eq!(&record.interval, interval);
    }
    // junctions are keyed by the end of the upstream interval
    let ends: Vec<i32> = read[3].junctions.iter().map(|j| j.0).collect();
    assert_eq!(ends, vec![361]);
}
