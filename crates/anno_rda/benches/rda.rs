use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn build_archive(blocks: usize, files: usize) -> anno_rda::RdaArchive {
    let mut rda = anno_rda::RdaArchive::new();
    for _ in 0..blocks {
        rda.add_block();
    }
    for i in 0..files {
        let content = format!("<Asset><Index>{i}</Index></Asset>\n").repeat(64);
        rda.update_file(&format!("data/config/asset_{i:04}.xml"), content.into_bytes())
            .unwrap();
    }
    rda
}

fn get_input() -> Vec<u8> {
    build_archive(1, 256)
        .serialize(anno_rda::WriteOptions::default())
        .unwrap()
}

pub mod read {
    use anno_rda::RdaArchive;
    use divan::Bencher;

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(super::get_input).bench_values(|data| {
            divan::black_box(RdaArchive::from_bytes(data).unwrap());
        });
    }

    #[divan::bench]
    fn extract_file_first(bencher: Bencher) {
        bencher
            .with_inputs(|| RdaArchive::from_bytes(super::get_input()).unwrap())
            .bench_local_refs(|rda| {
                divan::black_box(rda.extract_file("data/config/asset_0000.xml").unwrap());
            });
    }

    #[divan::bench(sample_count = 10)]
    fn extract_file_all(bencher: Bencher) {
        bencher
            .with_inputs(|| RdaArchive::from_bytes(super::get_input()).unwrap())
            .bench_local_refs(|rda| {
                let names = rda.file_names().map(str::to_owned).collect::<Vec<_>>();
                for name in names {
                    divan::black_box(rda.extract_file(&name).unwrap());
                }
            });
    }
}

pub mod write {
    use anno_rda::WriteOptions;
    use divan::Bencher;

    #[divan::bench(args = [1, 4, 16])]
    fn serialize(bencher: Bencher, blocks: usize) {
        bencher
            .with_inputs(|| super::build_archive(blocks, 256))
            .bench_local_refs(|rda| {
                divan::black_box(rda.serialize(WriteOptions::default()).unwrap());
            });
    }

    #[divan::bench]
    fn serialize_encrypted(bencher: Bencher) {
        let options = WriteOptions::builder().encrypt(true).build();
        bencher
            .with_inputs(|| super::build_archive(1, 256))
            .bench_local_refs(|rda| {
                divan::black_box(rda.serialize(options).unwrap());
            });
    }
}
