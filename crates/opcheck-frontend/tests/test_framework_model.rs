//! Saving, loading and replaying traced framework models.

use opcheck_core::{DataType, PadMode, Tensor};
use opcheck_frontend::{trace_module, FrameworkModel, ListPadModule, Module, PadModule};

#[test]
fn test_replay_matches_forward() {
    let module = ListPadModule::new(PadMode::Constant, Some(42.0));
    let inputs = vec![
        Tensor::from_data(vec![1.0; 12], vec![1, 3, 4], DataType::F32).unwrap(),
        Tensor::from_i32(vec![3], vec![]).unwrap(),
        Tensor::from_i32(vec![1], vec![]).unwrap(),
    ];
    let named: Vec<(String, Tensor)> = inputs
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("input{i}"), t.clone()))
        .collect();
    let traced = trace_module(&module, "list_pad", &named).unwrap();
    assert_eq!(
        traced.op_tags(),
        vec![
            "aten::floor_divide",
            "aten::sub",
            "prim::ListConstruct",
            "aten::pad"
        ]
    );

    let replayed = traced.run(&inputs).unwrap();
    let eager = module.forward(&inputs).unwrap();
    assert_eq!(replayed[0].to_vec().unwrap(), eager[0].to_vec().unwrap());
}

#[test]
fn test_file_round_trip_keeps_constants() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let module = ListPadModule::new(PadMode::Constant, None);
    let named = vec![
        (
            "x".to_string(),
            Tensor::zeros(vec![2, 2], DataType::F32).unwrap(),
        ),
        ("w".to_string(), Tensor::from_i32(vec![2], vec![]).unwrap()),
        ("h".to_string(), Tensor::from_i32(vec![0], vec![]).unwrap()),
    ];
    let traced = trace_module(&module, "list_pad", &named).unwrap();
    traced.save_to_file(&path).unwrap();

    let loaded = FrameworkModel::load_from_file(&path).unwrap();
    assert_eq!(loaded.input_names(), traced.input_names());
    assert_eq!(loaded.constants.len(), 1);
    assert_eq!(loaded.graph.edges.len(), traced.graph.edges.len());
}

#[test]
fn test_wrong_input_count() {
    let module = PadModule::new(vec![1, 1], PadMode::Constant, None);
    let x = Tensor::zeros(vec![2], DataType::F32).unwrap();
    let traced = trace_module(&module, "pad", &[("x".to_string(), x)]).unwrap();
    assert!(traced.run(&[]).is_err());
    assert_eq!(module.op_tag(), "aten::pad");
}
