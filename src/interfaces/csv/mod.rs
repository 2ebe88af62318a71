pub mod plot_reader;
